//! Wire class ids.
//!
//! Every serializable payload is framed with one of these 4-byte ids. The
//! unsigned integer ids decode into the signed variants; value range is
//! the contract, not the wire tag. Ids that were retired on the server
//! side (PARAMETER, BITSET, OBJECTID, SQL_DATA) are not listed; receiving
//! one fails with `ClassNotFound` like any other unregistered id.

pub const NONE: i32 = 0;
pub const STATUS: i32 = 1;
pub const INTEGER_DATA: i32 = 2;
pub const UNSIGNED_INTEGER_DATA: i32 = 3;
pub const INTEGER64_DATA: i32 = 4;
pub const UNSIGNED_INTEGER64_DATA: i32 = 5;
pub const FLOAT_DATA: i32 = 6;
pub const DOUBLE_DATA: i32 = 7;
pub const DECIMAL_DATA: i32 = 8;
pub const STRING_DATA: i32 = 9;
pub const DATE_DATA: i32 = 10;
pub const DATE_TIME_DATA: i32 = 11;
pub const INTEGER_ARRAY_DATA: i32 = 12;
pub const UNSIGNED_INTEGER_ARRAY_DATA: i32 = 13;
pub const STRING_ARRAY_DATA: i32 = 14;
pub const DATA_ARRAY_DATA: i32 = 15;
pub const BINARY_DATA: i32 = 16;
pub const NULL_DATA: i32 = 17;
pub const EXCEPTION_DATA: i32 = 18;
pub const COMPRESSED_STRING_DATA: i32 = 21;
pub const COMPRESSED_BINARY_DATA: i32 = 22;
pub const REQUEST: i32 = 24;
pub const LANGUAGE_DATA: i32 = 25;
pub const COLUMN_META_DATA: i32 = 27;
pub const RESULTSET_META_DATA: i32 = 28;
pub const WORD_DATA: i32 = 29;
pub const ERROR_LEVEL: i32 = 30;
