pub mod path_locator;
