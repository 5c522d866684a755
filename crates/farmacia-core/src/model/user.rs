use serde::{Deserialize, Serialize};

/// The logged-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: super::EntityId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}
