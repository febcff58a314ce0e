pub mod rules;
pub mod test_setup;
