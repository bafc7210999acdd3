/// Data layer: core types, artifact loading, and sample files.
///
/// Architecture:
/// ```text
///  model.json / scaler.json / defaults.json        samples.csv
///        │                                              │
///        ▼                                              ▼
///   ┌──────────┐                                  ┌──────────┐
///   │  loader   │  parse + validate artifacts     │  loader   │  rows → RawInputs
///   └──────────┘                                  └──────────┘
///        │                                              │
///        ▼                                              ▼
///   ┌──────────────┐                          ┌────────────────┐
///   │ ArtifactStore │ ◄──────────────────────  │ batch::run_batch│
///   └──────────────┘                          └────────────────┘
/// ```

pub mod loader;
pub mod model;
