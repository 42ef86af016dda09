use r01f_domain::model_object::ModelObject;
use r01f_domain::oid::Oid;
use r01f_domain::value_object::EntityVersion;
use r01f_macros::{model_object, oid};

#[oid]
pub struct InvoiceOid(uuid::Uuid);

#[model_object(oid = InvoiceOid)]
#[derive(Clone, PartialEq)]
pub struct Invoice {
    pub total_cents: i64,
}

// 已声明的元数据字段保留原定义
#[model_object(oid = InvoiceOid, tag = "legacy_invoice", debug = false)]
#[derive(Clone)]
struct LegacyInvoice {
    numeric_id: Option<u64>,
    memo: String,
}

impl std::fmt::Debug for LegacyInvoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LegacyInvoice(..)")
    }
}

fn main() {
    let mut invoice = Invoice {
        total_cents: 1200,
        ..Default::default()
    };
    assert_eq!(Invoice::TYPE, "invoice");
    assert!(invoice.oid().is_none());

    invoice.set_oid(InvoiceOid::generate());
    invoice.set_entity_version(EntityVersion::from_value(3));
    assert_eq!(invoice.entity_version().value(), 3);
    assert!(invoice.clone() == invoice);

    let legacy = LegacyInvoice {
        memo: "m".to_string(),
        ..Default::default()
    };
    assert_eq!(LegacyInvoice::TYPE, "legacy_invoice");
    assert_eq!(format!("{:?}", legacy), "LegacyInvoice(..)");
    assert_eq!(legacy.memo, "m");
}
