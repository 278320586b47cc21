//! Who is asking: departments, roles, and the acting user.
//!
//! Identity is established by the outer request layer; the core only reads
//! it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Organisational scope for routing and knowledge filtering.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
  Registration,
  It,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  Student,
  Staff,
  Admin,
}

/// The authenticated caller of a core operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
  pub user_id:    String,
  pub role:       Role,
  /// The user's home department, if they have one.
  pub department: Option<Department>,
}

impl Actor {
  pub fn is_staff(&self) -> bool { matches!(self.role, Role::Staff | Role::Admin) }

  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}
