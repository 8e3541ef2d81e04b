use uuid::Uuid;

pub const REFERENCE_PREFIX: &str = "JM-";

/// 生成支付 reference: `JM-` + 12 位大写十六进制
///
/// 碰撞概率可忽略，但仍以数据库唯一约束为准。
pub fn generate_payment_reference() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{REFERENCE_PREFIX}{}", hex[..12].to_ascii_uppercase())
}
