pub mod collect;
pub mod option_data;
