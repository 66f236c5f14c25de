//! String-backed enumerations stored on domain records.

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;

/// Message security policy negotiated with an OPC UA server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum SecurityPolicy {
    #[sea_orm(string_value = "Aes256_Sha256_RsaPss")]
    Aes256Sha256RsaPss,
    #[sea_orm(string_value = "Aes128_Sha256_RsaOaep")]
    Aes128Sha256RsaOaep,
    #[sea_orm(string_value = "Basic256Sha256")]
    Basic256Sha256,
    /// No message encryption.
    #[sea_orm(string_value = "None")]
    NoSecurity,
    #[sea_orm(string_value = "Basic256")]
    Basic256,
    #[sea_orm(string_value = "Basic128Rsa15")]
    Basic128Rsa15,
}

/// How a client authenticates against an OPC UA server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AuthMethod {
    #[sea_orm(string_value = "anonymous")]
    Anonymous,
    #[sea_orm(string_value = "username")]
    Username,
}

/// A user's role inside one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    #[sea_orm(string_value = "owner")]
    Owner,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "member")]
    Member,
}
