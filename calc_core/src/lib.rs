//! # calc_core - Calculator Toolbox Engine
//!
//! `calc_core` is the computational heart of the calculator toolbox: two
//! key-driven calculators, a unit converter, a currency converter and an age
//! calculator. Every front end (CLI, GUI, web) only maps its input events
//! onto these operations and renders the strings they return.
//!
//! ## Design Philosophy
//!
//! - **Key-driven**: Calculators are state machines fed one key at a time
//! - **Typed failures**: Every failure is a [`CalcError`], never a panic
//! - **JSON-First**: States, tables and results implement Serialize
//! - **Caller-supplied data**: Unit and rate tables are plain values
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::accumulator::CalculatorState;
//! use calc_core::expression::ExpressionState;
//!
//! // Immediate-execution calculator
//! let mut calc = CalculatorState::default();
//! for key in ["5", "+", "3", "="] {
//!     calc.press(key.parse().unwrap());
//! }
//! assert_eq!(calc.display(), "8");
//!
//! // Free-text calculator
//! let mut expr = ExpressionState::default();
//! for key in ["2", "+", "3", "*", "4", "="] {
//!     expr.press(key.parse().unwrap());
//! }
//! assert_eq!(expr.result(), &Ok(14.0));
//! ```
//!
//! ## Modules
//!
//! - [`primitives`] - Arithmetic primitives shared by both calculators
//! - [`accumulator`] - Immediate-execution calculator
//! - [`expression`] - Free-text expression calculator
//! - [`units`] - Table-driven unit conversion
//! - [`currency`] - Exchange-rate lookup
//! - [`age`] - Age and next-birthday calculation
//! - [`config`] - JSON configuration with atomic saves
//! - [`format`] - Number display
//! - [`errors`] - Structured error types

pub mod accumulator;
pub mod age;
pub mod config;
pub mod currency;
pub mod errors;
pub mod expression;
pub mod format;
pub mod primitives;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use accumulator::{handle_token, CalculatorState, Token};
pub use age::{compute_age, compute_age_str, AgeBreakdown};
pub use config::{load_config, save_config, ToolboxConfig};
pub use currency::{convert_currency, CurrencyRateTable};
pub use errors::{CalcError, CalcResult};
pub use expression::{evaluate, ExprKey, ExpressionState};
pub use units::{convert_unit, UnitCategory, UnitTable};
