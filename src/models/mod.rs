pub mod price;
pub mod earnings;
pub mod options;
pub mod analysis;
pub mod profile;
