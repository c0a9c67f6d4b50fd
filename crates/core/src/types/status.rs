//! Role and status enums for library entities.

use serde::{Deserialize, Serialize};

/// Account role as reported by the library backend.
///
/// The backend labels member accounts `user` on the wire; the portal calls
/// them students throughout. Serde keeps the wire label, `Display` the
/// portal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A library member who borrows, reserves, and pays fines.
    #[default]
    #[serde(rename = "user", alias = "student")]
    Student,
    /// Library staff with access to the reports dashboard.
    Admin,
}

impl Role {
    /// Whether this role grants access to the admin dashboard.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" | "user" => Ok(Self::Student),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Payment status of a fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
}

impl PaymentStatus {
    /// Whether the fine still awaits payment.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Lifecycle status of a book reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Fulfilled,
    Cancelled,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Fulfilled => write!(f, "fulfilled"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "fulfilled" => Ok(Self::Fulfilled),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid reservation status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_label() {
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_role_accepts_both_member_labels() {
        assert_eq!(serde_json::from_str::<Role>("\"user\"").unwrap(), Role::Student);
        assert_eq!(
            serde_json::from_str::<Role>("\"student\"").unwrap(),
            Role::Student
        );
        assert_eq!(serde_json::from_str::<Role>("\"admin\"").unwrap(), Role::Admin);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Student.to_string(), "student");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert_eq!("user".parse::<Role>().unwrap(), Role::Student);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("librarian".parse::<Role>().is_err());
    }

    #[test]
    fn test_payment_status_labels() {
        assert_eq!(
            serde_json::from_str::<PaymentStatus>("\"pending\"").unwrap(),
            PaymentStatus::Pending
        );
        assert_eq!(
            serde_json::from_str::<PaymentStatus>("\"completed\"").unwrap(),
            PaymentStatus::Completed
        );
        assert!(PaymentStatus::Pending.is_pending());
        assert!(!PaymentStatus::Completed.is_pending());
    }

    #[test]
    fn test_reservation_status_labels() {
        assert_eq!(
            serde_json::from_str::<ReservationStatus>("\"pending\"").unwrap(),
            ReservationStatus::Pending
        );
        assert_eq!(ReservationStatus::Fulfilled.to_string(), "fulfilled");
        assert_eq!(
            "cancelled".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Cancelled
        );
    }
}
