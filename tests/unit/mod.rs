pub mod editor_tests;
pub mod property_tests;
pub mod replacement_tests;
pub mod search_tests;
