pub mod generator;
pub mod precomputed;

pub use generator::{
    generate_symbolic_features, GenerationStats, ProgramSummary, SymbolicFeatureGenerator,
    SymbolicFeatureSet, SymbolicMetadata, SYMBOLIC_PREFIX,
};
pub use precomputed::PrecomputedSymbolicGenerator;
