// Request and response envelopes for the non-CRUD endpoints.
//
// CRUD records are generic (`Serialize`/`DeserializeOwned`) so the domain
// types in `farmacia-core` travel over the wire unchanged.

use serde::{Deserialize, Serialize};

/// Body of `POST /login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Answer of `POST /login`: `{ "user": { ... } }`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse<U> {
    pub user: U,
}

/// Body of `POST /register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub nome: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /transmitir`. Dates are ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmitRequest {
    pub data_inicial: String,
    pub data_final: String,
}

/// Body of `POST /pagamentos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub empresa_id: String,
}
