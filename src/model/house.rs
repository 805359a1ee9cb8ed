use serde::{Deserialize, Serialize};

/// The role of a user. Only admins can see every work group.
///
/// The short codes from the legacy user table (`ADM`, `PRE`, `OPE`) are accepted when parsing.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "ADM")]
    Admin,
    #[default]
    #[serde(alias = "PRE", alias = "OPE")]
    Resident,
}

serde_plain::derive_display_from_serialize!(Role);
serde_plain::derive_fromstr_from_deserialize!(Role);

/// A house in the community. The house id doubles as the id of the user responsible for it.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct House {
    pub id: i64,
    /// The name of the person responsible for the house.
    pub responsible: String,
    pub role: Role,
    pub location: Option<String>,
    pub email: Option<String>,
}

#[test]
fn test_role_parse() {
    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!("ADM".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!("OPE".parse::<Role>().unwrap(), Role::Resident);
    assert_eq!(Role::Resident.to_string(), "resident");
    assert!("root".parse::<Role>().is_err());
}
