pub mod data_gov;
