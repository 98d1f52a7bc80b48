pub mod counter;
pub mod db_data;
