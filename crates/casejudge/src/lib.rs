//! A library for verifying code submissions against test cases.
//!
//! Casejudge runs untrusted source code in a throwaway subprocess under a
//! wall clock limit, compares its output with the expected output of each
//! test case and folds the results into a single verdict.
//!
//! # Features
//!
//! - **Time-bounded execution**: every run gets a fresh temporary workspace and is killed on timeout.
//! - **Verdicts as data**: runner and verifier never fail; every problem is reported in the result.
//! - **Multi-language**: interpreters are described in TOML configuration.
//! - **Problem store**: test cases can be fetched over HTTP and are cached per problem.
//! - **Bounded parallelism**: cases of a submission may run concurrently, reported in input order.

pub use config::{Config, ConfigError, EXAMPLE_CONFIG, Language};
pub use runner::{
    InterpretedRunner, LanguageRunner, RunError, RunnerRegistry, SyntaxCheck, Workspace,
};
pub use store::{
    CachedProblemStore, HttpProblemStore, InMemoryProblemStore, ProblemStore, StoreError,
};
pub use types::{ExecutionResult, LimitsError, ResourceLimits, TestCase};
pub use verdict::{AggregateVerdict, CaseVerdict, ErrorKind, OverallStatus};
pub use verifier::{VerificationRequest, Verifier, VerifyError};

pub mod config;
pub mod runner;
pub mod store;
pub mod types;
pub mod verdict;
pub mod verifier;
