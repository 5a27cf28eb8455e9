//! Data models for Invent

pub mod admin;
pub mod credential;
pub mod employee;
pub mod enums;
pub mod equipment;
pub mod equipment_type;
pub mod event;
pub mod fields;

// Re-export commonly used types
pub use credential::Credential;
pub use employee::{Employee, EmployeeProfile, TerritoryGroup};
pub use enums::{EquipmentState, EventCategory, Territory};
pub use equipment::{Equipment, EquipmentDetail, EquipmentFilter, EquipmentQuery, FilterOptions};
pub use equipment_type::EquipmentType;
pub use event::Event;
