// ── Mock fixtures ──
//
// Initial contents of every store in mock mode: the demo records an
// operator sees before touching anything.

use chrono::NaiveDate;

use crate::lifecycle::DocumentStatus;
use crate::model::{
    Company, Document, DocumentHeader, DocumentKind, EntityId, EntradaHeader, InventarioHeader,
    LineItem, Ordinance, PerdaHeader, Product, SaidaHeader, StockEntry, Supplier,
    TherapeuticClass, User,
};

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn item(id: &str, product: &str, quantity: u32, lot: &str) -> LineItem {
    LineItem {
        id: id.into(),
        product: product.into(),
        quantity,
        lot: lot.into(),
        manufactured_on: None,
        expires_on: None,
    }
}

fn draft(id: &str, header: DocumentHeader, items: Vec<LineItem>) -> Document {
    Document::restore(id.into(), header, DocumentStatus::Draft, items)
}

pub(crate) fn documents(kind: DocumentKind) -> Vec<Document> {
    match kind {
        DocumentKind::Entrada => vec![draft(
            "1",
            DocumentHeader::Entrada(EntradaHeader {
                supplier_id: Some("1".into()),
                supplier_name: "Fornecedor ABC".into(),
                entry_date: date(2024, 2, 26),
            }),
            vec![item("1", "Medicamento A", 10, "LOTE123")],
        )],
        DocumentKind::Saida => vec![draft(
            "1",
            DocumentHeader::Saida(SaidaHeader {
                patient_name: "Maria Santos".into(),
                patient_cpf: "12345678901".into(),
                doctor_name: "Dr. José Silva".into(),
                doctor_license: "54321".into(),
                exit_date: date(2024, 2, 26),
                prescription_date: date(2024, 2, 25),
                prescription_number: Some("123456".into()),
                prescription_type: Some("Receita Amarela".into()),
                medical_council: Some("CRM".into()),
            }),
            vec![item("1", "Medicamento X", 2, "ABC123")],
        )],
        DocumentKind::Perda => vec![draft(
            "1",
            DocumentHeader::Perda(PerdaHeader {
                loss_date: date(2024, 2, 26),
                reason: "Vencimento".into(),
            }),
            vec![item("1", "Medicamento A", 10, "LOTE123")],
        )],
        DocumentKind::Inventario => vec![
            draft(
                "1",
                DocumentHeader::Inventario(InventarioHeader {
                    count_date: date(2024, 2, 26),
                    reason: "Inventário anual".into(),
                }),
                vec![
                    item("1", "Medicamento A", 100, "LOTE123"),
                    item("2", "Medicamento B", 50, "LOTE456"),
                ],
            ),
            draft(
                "2",
                DocumentHeader::Inventario(InventarioHeader {
                    count_date: date(2024, 2, 25),
                    reason: "Conferência especial".into(),
                }),
                vec![item("3", "Medicamento C", 75, "LOTE789")],
            ),
        ],
    }
}

pub(crate) fn products() -> Vec<Product> {
    vec![Product {
        id: Some("1".into()),
        name: "Produto Teste".into(),
        description: "Descrição do produto teste".into(),
        barcode: "7891234567890".into(),
        ms_registration: "1234567890123".into(),
        therapeutic_class: TherapeuticClass::Antimicrobial,
        ordinance: Ordinance::AM,
        gtin: None,
        quantity: None,
        presentation: None,
        manufactured_on: None,
        expires_on: None,
    }]
}

pub(crate) fn suppliers() -> Vec<Supplier> {
    vec![Supplier {
        id: Some("1".into()),
        name: "Fornecedor Teste".into(),
        cnpj: "12345678901234".into(),
        email: "fornecedor@teste.com".into(),
        phone: "(11) 1234-5678".into(),
    }]
}

pub(crate) fn companies() -> Vec<Company> {
    vec![
        Company {
            id: Some("1".into()),
            legal_name: "Farmácia Teste Ltda".into(),
            cnpj: "12345678901234".into(),
            email: "contato@farmaciateste.com".into(),
            phone: "(11) 1234-5678".into(),
            address: "Rua Teste, 123".into(),
            city: "São Paulo".into(),
            state: "SP".into(),
            cep: "12345-678".into(),
        },
        Company {
            id: Some("2".into()),
            legal_name: "Empresa B".into(),
            cnpj: "98765432000110".into(),
            email: "financeiro@empresab.com".into(),
            phone: "(11) 8765-4321".into(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            cep: String::new(),
        },
    ]
}

pub(crate) fn stock() -> Vec<StockEntry> {
    vec![
        StockEntry {
            id: "1".into(),
            description: "Medicamento A".into(),
            ean: "7891234567890".into(),
            ms_registration: "1234567890123".into(),
            quantity: 100,
            lot: "LOTE123".into(),
            manufactured_on: date(2024, 1, 1),
            expires_on: date(2025, 1, 1),
        },
        StockEntry {
            id: "2".into(),
            description: "Medicamento B".into(),
            ean: "7891234567891".into(),
            ms_registration: "1234567890124".into(),
            quantity: 50,
            lot: "LOTE456".into(),
            manufactured_on: date(2024, 2, 1),
            expires_on: date(2025, 2, 1),
        },
    ]
}

/// The user every mock login resolves to.
pub(crate) fn user(email: &str) -> User {
    User {
        id: EntityId::from("1"),
        name: "Usuário Teste".into(),
        email: email.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use strum::IntoEnumIterator;

    #[test]
    fn fixture_documents_are_valid_drafts() {
        for kind in DocumentKind::iter() {
            for doc in documents(kind) {
                assert_eq!(doc.kind(), kind);
                assert!(doc.header().missing_fields().is_empty(), "{kind} {}", doc.id);
                assert!(doc.status().is_draft());
            }
        }
    }

    #[test]
    fn fixture_master_data_is_valid() {
        assert!(products().iter().all(|p| p.validate().is_ok()));
        assert!(suppliers().iter().all(|s| s.validate().is_ok()));
        assert!(companies().iter().all(|c| c.validate().is_ok()));
    }
}
