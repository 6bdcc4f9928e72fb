pub mod assessment;
pub mod dashboard;
pub mod evidence;
pub mod indicator;
pub mod instansi;
pub mod kegiatan;
pub mod performance_data;
pub mod program;
pub mod report;
pub mod status;
pub mod target;
pub mod user;

pub use status::DbEnum;
