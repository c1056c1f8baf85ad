//! Prompt context: budgeted assembly and token counting.
//!
//! | Part | Source | Trim Strategy |
//! |------|--------|---------------|
//! | Introduction | Prompt config | Never trimmed |
//! | Document sections | Ranked retrieval | Lowest-ranked dropped first, whole sections only |
//! | Question | User | Never trimmed |

pub mod assembler;
pub mod token;

pub use assembler::{
    AssembledPrompt, AssemblyError, AssemblyInput, AssemblyMetadata, PromptAssembler,
};
pub use token::{CharEstimateCounter, TiktokenCounter};
