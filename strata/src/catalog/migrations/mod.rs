//! Application migrations, one module per version.

mod m1_0_0_init;
mod m1_1_0_add_user_display_name;
mod m1_2_0_create_audit_log;
mod m1_3_0_seed_auditor_role;
mod m1_4_0_require_user_email;
mod m1_4_1_drop_user_legacy_token;

pub use m1_0_0_init::Init;
pub use m1_1_0_add_user_display_name::AddUserDisplayName;
pub use m1_2_0_create_audit_log::CreateAuditLog;
pub use m1_3_0_seed_auditor_role::SeedAuditorRole;
pub use m1_4_0_require_user_email::{PLACEHOLDER_EMAIL, RequireUserEmail};
pub use m1_4_1_drop_user_legacy_token::DropUserLegacyToken;
