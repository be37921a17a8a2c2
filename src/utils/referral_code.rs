use crate::entities::customer_entity as customers;
use crate::error::AppResult;
use rand::Rng;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 8;

/// 8-character code without look-alike characters (0/O, 1/I).
pub fn generate_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Referral code not yet used inside the organization.
pub async fn generate_unique_referral_code<C>(db: &C, organization_id: Uuid) -> AppResult<String>
where
    C: ConnectionTrait,
{
    loop {
        let code = generate_referral_code();
        let exists = customers::Entity::find()
            .filter(customers::Column::OrganizationId.eq(organization_id))
            .filter(customers::Column::ReferralCode.eq(code.as_str()))
            .count(db)
            .await?;

        if exists == 0 {
            return Ok(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_referral_code_format() {
        let code = generate_referral_code();
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
        assert!(!code.contains('O') && !code.contains('0'));
    }
}
