/// SQL type tag of a result column.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SqlType {
    #[default]
    Unknown = 0,
    Character = 1,
    CharacterVarying = 2,
    NationalCharacter = 3,
    NationalCharacterVarying = 4,
    Binary = 5,
    BinaryVarying = 6,
    CharacterLargeObject = 7,
    NationalCharacterLargeObject = 8,
    BinaryLargeObject = 9,
    Numeric = 10,
    SmallInt = 11,
    Integer = 12,
    BigInt = 13,
    Decimal = 14,
    Float = 15,
    Real = 16,
    DoublePrecision = 17,
    Boolean = 18,
    Date = 19,
    Time = 20,
    Timestamp = 21,
    Language = 22,
    Word = 23,
}

impl SqlType {
    pub fn to_i32(self) -> i32 {
        self as i32
    }

    /// Unknown tags (a server newer than this client) map to `Unknown`.
    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::Character,
            2 => Self::CharacterVarying,
            3 => Self::NationalCharacter,
            4 => Self::NationalCharacterVarying,
            5 => Self::Binary,
            6 => Self::BinaryVarying,
            7 => Self::CharacterLargeObject,
            8 => Self::NationalCharacterLargeObject,
            9 => Self::BinaryLargeObject,
            10 => Self::Numeric,
            11 => Self::SmallInt,
            12 => Self::Integer,
            13 => Self::BigInt,
            14 => Self::Decimal,
            15 => Self::Float,
            16 => Self::Real,
            17 => Self::DoublePrecision,
            18 => Self::Boolean,
            19 => Self::Date,
            20 => Self::Time,
            21 => Self::Timestamp,
            22 => Self::Language,
            23 => Self::Word,
            _ => Self::Unknown,
        }
    }
}
