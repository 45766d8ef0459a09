//! MTL-FRAME: dataframe joins and reshaping
//!
//! Every operation takes frames by reference and returns a new frame; the
//! rows a reader produced are never modified.
//!
//! # Example
//!
//! ```
//! use mtl_core::Dataframe;
//! use mtl_frame::inner_join;
//!
//! let left = Dataframe::from_pairs(vec![vec![("id", Some("1")), ("v", Some("x"))]]);
//! let right = Dataframe::from_pairs(vec![
//!     vec![("id", Some("1")), ("w", Some("y"))],
//!     vec![("id", Some("1")), ("w", Some("z"))],
//! ]);
//!
//! let joined = inner_join(&left, &right, "id", "id").unwrap();
//! assert_eq!(joined.len(), 2);
//! ```

pub mod error;
pub mod join;
pub mod ops;

pub use error::FrameError;
pub use join::{inner_join, left_join};
pub use ops::{
    hash_columns, hash_columns_unambiguous, remove_duplicate_rows, rename_column, select_columns,
};
