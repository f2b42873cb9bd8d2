//! Field type enumeration for document metadata

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tag selecting rendering/validation behaviour of a docfield.
///
/// `SectionBreak`, `ColumnBreak`, `TabBreak` and `Fold` are structural
/// markers consumed by the layout builder, not data fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    #[default]
    Data,
    Int,
    Float,
    Currency,
    Percent,
    Check,
    Select,
    Link,
    DynamicLink,
    Date,
    Datetime,
    Time,
    Text,
    SmallText,
    LongText,
    TextEditor,
    Code,
    ReadOnly,
    Attach,
    AttachImage,
    Table,
    TableMultiSelect,
    Button,
    Html,
    Image,
    Heading,
    SectionBreak,
    ColumnBreak,
    TabBreak,
    Fold,
    /// Any fieldtype this client has no dedicated variant for.
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Data => "Data",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Currency => "Currency",
            Self::Percent => "Percent",
            Self::Check => "Check",
            Self::Select => "Select",
            Self::Link => "Link",
            Self::DynamicLink => "Dynamic Link",
            Self::Date => "Date",
            Self::Datetime => "Datetime",
            Self::Time => "Time",
            Self::Text => "Text",
            Self::SmallText => "Small Text",
            Self::LongText => "Long Text",
            Self::TextEditor => "Text Editor",
            Self::Code => "Code",
            Self::ReadOnly => "Read Only",
            Self::Attach => "Attach",
            Self::AttachImage => "Attach Image",
            Self::Table => "Table",
            Self::TableMultiSelect => "Table MultiSelect",
            Self::Button => "Button",
            Self::Html => "HTML",
            Self::Image => "Image",
            Self::Heading => "Heading",
            Self::SectionBreak => "Section Break",
            Self::ColumnBreak => "Column Break",
            Self::TabBreak => "Tab Break",
            Self::Fold => "Fold",
            Self::Other(name) => name,
        }
    }

    pub fn parse(name: &str) -> Self {
        match name {
            "Data" => Self::Data,
            "Int" => Self::Int,
            "Float" => Self::Float,
            "Currency" => Self::Currency,
            "Percent" => Self::Percent,
            "Check" => Self::Check,
            "Select" => Self::Select,
            "Link" => Self::Link,
            "Dynamic Link" => Self::DynamicLink,
            "Date" => Self::Date,
            "Datetime" => Self::Datetime,
            "Time" => Self::Time,
            "Text" => Self::Text,
            "Small Text" => Self::SmallText,
            "Long Text" => Self::LongText,
            "Text Editor" => Self::TextEditor,
            "Code" => Self::Code,
            "Read Only" => Self::ReadOnly,
            "Attach" => Self::Attach,
            "Attach Image" => Self::AttachImage,
            "Table" => Self::Table,
            "Table MultiSelect" => Self::TableMultiSelect,
            "Button" => Self::Button,
            "HTML" => Self::Html,
            "Image" => Self::Image,
            "Heading" => Self::Heading,
            "Section Break" => Self::SectionBreak,
            "Column Break" => Self::ColumnBreak,
            "Tab Break" => Self::TabBreak,
            "Fold" => Self::Fold,
            other => Self::Other(other.to_string()),
        }
    }

    /// Structural markers that open containers instead of controls.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::SectionBreak | Self::ColumnBreak | Self::TabBreak | Self::Fold
        )
    }

    /// Types that never hold a value of their own.
    pub fn is_no_value(&self) -> bool {
        self.is_structural()
            || matches!(
                self,
                Self::Html
                    | Self::Table
                    | Self::TableMultiSelect
                    | Self::Button
                    | Self::Image
                    | Self::Heading
            )
    }

    /// Types that stay visible in read mode even when empty.
    pub fn is_display_only(&self) -> bool {
        matches!(self, Self::Html | Self::Image | Self::Button)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Currency | Self::Percent)
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table | Self::TableMultiSelect)
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}
