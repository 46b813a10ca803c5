//! # bin2dec-evo
//!
//! A genetic algorithm for bounded real-valued optimization over binary-encoded genomes.
//!
//! Each decision variable is stored as a fixed-width unsigned integer inside one bit
//! string and decoded linearly onto its `[lower, upper]` interval. The engine is a
//! generational GA: sigma truncation scaling, roulette wheel selection, one-point
//! crossover and bit-flip mutation, with the best genome of the run always retained.
//!
//! ## Core Concepts
//!
//! - **Phenotype map**: the ordered list of variables, each with a bit width and bounds
//! - **Memoized scores**: a genome calls the objective once until its bits change
//! - **Injected collaborators**: the objective and the statistics sink are supplied by the caller
//!
//! ## Quick Start
//!
//! ```rust
//! use bin2dec_evo::prelude::*;
//!
//! let map = PhenotypeMap::builder()
//!     .add(16, -5.0, 5.0)?
//!     .add(16, -5.0, 5.0)?
//!     .build()?;
//!
//! let objective = FnObjective::new(|x: &[f64]| -(x[0] * x[0] + x[1] * x[1]));
//!
//! let result = SimpleGA::builder(map, objective)
//!     .population_size(50)
//!     .n_generations(20)
//!     .random_seed(42)
//!     .build()?
//!     .run()?;
//!
//! assert_eq!(result.best_phenotype().len(), 2);
//! # Ok::<(), bin2dec_evo::error::EvolutionError>(())
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod operators;
pub mod population;
pub mod scaling;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::scaling::*;
    pub use crate::termination::prelude::*;
}
