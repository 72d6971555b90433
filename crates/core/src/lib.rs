#![forbid(unsafe_code)]

pub mod values {
    /// Declared type of a coded variable; selects the value table that stores it.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum DataType {
        Boolean,
        Integer,
        ShortText,
        LongText,
    }

    impl DataType {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Boolean => "boolean",
                Self::Integer => "integer",
                Self::ShortText => "short text",
                Self::LongText => "long text",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "boolean" => Some(Self::Boolean),
                "integer" => Some(Self::Integer),
                "short text" => Some(Self::ShortText),
                "long text" => Some(Self::LongText),
                _ => None,
            }
        }

        pub fn table(self) -> &'static str {
            match self {
                Self::Boolean => "DATABOOLEAN",
                Self::Integer => "DATAINTEGER",
                Self::ShortText => "DATASHORTTEXT",
                Self::LongText => "DATALONGTEXT",
            }
        }
    }

    /// Payload of one coded value. The variant is the declared data type, so a
    /// value can never disagree with the table it is routed to.
    #[derive(Clone, Debug, PartialEq)]
    pub enum VariableValue {
        Boolean(bool),
        Integer(i64),
        ShortText(String),
        LongText(String),
    }

    impl VariableValue {
        pub fn data_type(&self) -> DataType {
            match self {
                Self::Boolean(_) => DataType::Boolean,
                Self::Integer(_) => DataType::Integer,
                Self::ShortText(_) => DataType::ShortText,
                Self::LongText(_) => DataType::LongText,
            }
        }
    }

    /// One coded variable value of a statement, keyed by variable name.
    #[derive(Clone, Debug, PartialEq)]
    pub struct Value {
        pub key: String,
        pub value: VariableValue,
    }

    impl Value {
        pub fn new(key: impl Into<String>, value: VariableValue) -> Self {
            Self {
                key: key.into(),
                value,
            }
        }

        pub fn data_type(&self) -> DataType {
            self.value.data_type()
        }
    }
}

pub mod model {
    use crate::values::Value;

    /// Id of a row that has not been persisted yet. Assigned by the database
    /// on first insert and reset here again on removal.
    pub const UNSAVED_ID: i64 = -1;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum StatementError {
        NegativeStart { start: i64 },
        EmptySpan { start: i64, stop: i64 },
    }

    /// One coded statement: a position span in a document plus the values
    /// coded for it.
    #[derive(Clone, Debug, PartialEq)]
    pub struct CodedStatement {
        id: i64,
        coder: i64,
        start: i64,
        stop: i64,
        statement_type_id: i64,
        values: Vec<Value>,
    }

    impl CodedStatement {
        pub fn try_new(
            coder: i64,
            start: i64,
            stop: i64,
            statement_type_id: i64,
            values: Vec<Value>,
        ) -> Result<Self, StatementError> {
            if start < 0 {
                return Err(StatementError::NegativeStart { start });
            }
            if start >= stop {
                return Err(StatementError::EmptySpan { start, stop });
            }
            Ok(Self {
                id: UNSAVED_ID,
                coder,
                start,
                stop,
                statement_type_id,
                values,
            })
        }

        pub fn id(&self) -> i64 {
            self.id
        }

        pub fn is_persisted(&self) -> bool {
            self.id != UNSAVED_ID
        }

        pub fn set_id(&mut self, id: i64) {
            self.id = id;
        }

        pub fn clear_id(&mut self) {
            self.id = UNSAVED_ID;
        }

        pub fn coder(&self) -> i64 {
            self.coder
        }

        pub fn start(&self) -> i64 {
            self.start
        }

        pub fn stop(&self) -> i64 {
            self.stop
        }

        pub fn statement_type_id(&self) -> i64 {
            self.statement_type_id
        }

        pub fn values(&self) -> &[Value] {
            &self.values
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum DocumentError {
        StatementOutOfBounds {
            start: i64,
            stop: i64,
            text_len: i64,
        },
    }

    /// One text document and the statements coded inside it.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EditableDocument {
        id: i64,
        title: String,
        text: String,
        coder: i64,
        author: String,
        source: String,
        section: String,
        notes: String,
        doc_type: String,
        date_ms: i64,
        statements: Vec<CodedStatement>,
    }

    impl EditableDocument {
        pub fn new(
            title: String,
            text: String,
            coder: i64,
            author: String,
            source: String,
            section: String,
            notes: String,
            doc_type: String,
            date_ms: i64,
        ) -> Self {
            Self {
                id: UNSAVED_ID,
                title,
                text,
                coder,
                author,
                source,
                section,
                notes,
                doc_type,
                date_ms,
                statements: Vec::new(),
            }
        }

        /// Attaches a statement. The span must lie inside the document text.
        pub fn add_statement(&mut self, statement: CodedStatement) -> Result<(), DocumentError> {
            let text_len = self.text.chars().count() as i64;
            if statement.stop() > text_len {
                return Err(DocumentError::StatementOutOfBounds {
                    start: statement.start(),
                    stop: statement.stop(),
                    text_len,
                });
            }
            self.statements.push(statement);
            Ok(())
        }

        pub fn id(&self) -> i64 {
            self.id
        }

        pub fn is_persisted(&self) -> bool {
            self.id != UNSAVED_ID
        }

        pub fn set_id(&mut self, id: i64) {
            self.id = id;
        }

        pub fn clear_id(&mut self) {
            self.id = UNSAVED_ID;
        }

        pub fn title(&self) -> &str {
            &self.title
        }

        pub fn text(&self) -> &str {
            &self.text
        }

        pub fn coder(&self) -> i64 {
            self.coder
        }

        pub fn author(&self) -> &str {
            &self.author
        }

        pub fn source(&self) -> &str {
            &self.source
        }

        pub fn section(&self) -> &str {
            &self.section
        }

        pub fn notes(&self) -> &str {
            &self.notes
        }

        pub fn doc_type(&self) -> &str {
            &self.doc_type
        }

        pub fn date_ms(&self) -> i64 {
            self.date_ms
        }

        pub fn statements(&self) -> &[CodedStatement] {
            &self.statements
        }

        /// Mutable view for id reconciliation after persistence round trips.
        /// A slice, so the collection itself cannot bypass span validation.
        pub fn statements_mut(&mut self) -> &mut [CodedStatement] {
            &mut self.statements
        }
    }
}
