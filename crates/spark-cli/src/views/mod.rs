pub mod calendar;
pub mod table;
