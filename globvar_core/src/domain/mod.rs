pub mod address;
pub mod declaration;
pub mod error;
pub mod table;
pub mod types;

pub use address::{AddressCursor, PlcAddress};
pub use declaration::{
    HmiInternalDecl, HmiInternalSection, IoMappingDecl, SectionDecls, SensorList,
    VariableDeclaration,
};
pub use error::{AllocError, ReadError};
pub use table::{
    DuplicatePolicy, GlobalVarRecord, GlobalVarTable, HmiTagRecord, HmiTagTable, RecordTable,
    TableKind,
};
pub use types::{HmiInternalType, ScalarType, VarType};
