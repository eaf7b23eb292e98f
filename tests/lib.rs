/// Main test module that includes all sub-modules
/// Run specific tests with `cargo test <module>::<submodule>`
/// For example: `cargo test integration::pipeline_test`
// Utility modules
pub mod utils;

// Integration tests
pub mod integration {
    pub mod parquet_test;
    pub mod pipeline_test;
}

// Algorithm tests
pub mod algorithm {
    pub mod derive_test;
    pub mod specification_test;
}
