//! Game master data: flat attribute records and the typed views the viewer
//! and battle log pipeline look up by id.

pub mod attributes;
pub mod buffer;
pub mod equip;
pub mod error;
pub mod item;
pub mod registry;
pub mod skill;
pub mod unit;

pub use attributes::AttributeRecord;
pub use buffer::BufferBase;
pub use equip::EquipBase;
pub use error::MasterDataError;
pub use item::ItemBase;
pub use registry::{load_master_data, MasterData, MasterDataSet, RecordTable};
pub use skill::{SkillBase, SkillBuffSlot};
pub use unit::UnitBase;
