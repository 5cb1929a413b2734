/// Data layer: core types, backend access, and series assembly.
///
/// Architecture:
/// ```text
///   catalog backend (HTTP)
///        │
///        ▼
///   ┌──────────┐
///   │  client   │  typed JSON retrievals → Vec<f64> per column
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ assemble  │  fan-out timestamp + columns, join → ChartBundle
///   └──────────┘
/// ```
pub mod assemble;
pub mod client;
pub mod model;

#[cfg(test)]
pub mod testutil;
