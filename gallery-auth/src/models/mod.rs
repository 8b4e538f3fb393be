pub mod media;
pub mod otp;
pub mod principal;

pub use media::{MediaAccess, Visibility};
pub use otp::{OtpPurpose, OtpRecord, VerifyOutcome};
pub use principal::{Actor, Principal, PrincipalResponse, Role};
