pub mod csv_table;

pub use csv_table::{save_table, write_table, OUTPUT_DATE_FORMAT};
