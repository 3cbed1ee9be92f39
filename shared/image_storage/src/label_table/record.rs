//! Label result rows and their `DynamoDB` item encoding
//!
//! Numbers are written as `DynamoDB` number attributes built from exact decimals, so the
//! digits stored are the digits detected, with no float rounding on the way in.

use std::collections::HashMap;
use std::str::FromStr;

use aws_sdk_dynamodb::types::AttributeValue;
use rust_decimal::Decimal;
use strum::Display;

use super::LabelTableError;

/// Attribute names of a label result row
#[derive(Debug, Clone, Copy, Display)]
pub enum LabelRecordAttribute {
    /// Image identifier (Primary Key)
    #[strum(serialize = "image")]
    Image,
    /// Content checksum of the labeled object
    #[strum(serialize = "eTag")]
    ETag,
    /// Detected labels
    #[strum(serialize = "Labels")]
    Labels,
}

/// Attribute names inside a stored label, matching the detection response shape
#[derive(Debug, Clone, Copy, Display)]
#[strum(serialize_all = "PascalCase")]
enum LabelAttribute {
    Name,
    Confidence,
    Instances,
    Parents,
    Aliases,
    Categories,
    BoundingBox,
    Width,
    Height,
    Left,
    Top,
}

/// One row of the label results table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    /// Image identifier, storage prefix stripped
    pub image: String,
    /// Content checksum reported by the upload notification
    pub e_tag: String,
    /// Labels in detection order, empty when the image format was rejected
    pub labels: Vec<DetectedLabel>,
}

/// A label produced by the detection service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectedLabel {
    /// Label name
    pub name: String,
    /// Confidence score in percent
    pub confidence: Option<Decimal>,
    /// Located occurrences of the label
    pub instances: Vec<LabelInstance>,
    /// Names of parent labels
    pub parents: Vec<String>,
    /// Names of alias labels
    pub aliases: Vec<String>,
    /// Names of label categories
    pub categories: Vec<String>,
}

/// A located occurrence of a label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelInstance {
    /// Location as ratios of the image dimensions
    pub bounding_box: Option<BoundingBox>,
    /// Confidence score in percent
    pub confidence: Option<Decimal>,
}

/// Bounding box as ratios of the image dimensions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundingBox {
    /// Width ratio
    pub width: Option<Decimal>,
    /// Height ratio
    pub height: Option<Decimal>,
    /// Left coordinate ratio
    pub left: Option<Decimal>,
    /// Top coordinate ratio
    pub top: Option<Decimal>,
}

type Item = HashMap<String, AttributeValue>;

impl LabelRecord {
    /// Encodes the record as a `DynamoDB` item
    #[must_use]
    pub fn to_item(&self) -> Item {
        HashMap::from([
            (
                LabelRecordAttribute::Image.to_string(),
                AttributeValue::S(self.image.clone()),
            ),
            (
                LabelRecordAttribute::ETag.to_string(),
                AttributeValue::S(self.e_tag.clone()),
            ),
            (
                LabelRecordAttribute::Labels.to_string(),
                AttributeValue::L(self.labels.iter().map(DetectedLabel::to_attribute).collect()),
            ),
        ])
    }

    /// Decodes a `DynamoDB` item
    ///
    /// # Errors
    ///
    /// Returns `LabelTableError::SerializationError` if an attribute is missing or has the wrong type
    pub fn from_item(item: &Item) -> Result<Self, LabelTableError> {
        Ok(Self {
            image: string_attr(item, &LabelRecordAttribute::Image.to_string())?,
            e_tag: string_attr(item, &LabelRecordAttribute::ETag.to_string())?,
            labels: list_attr(item, &LabelRecordAttribute::Labels.to_string())?
                .iter()
                .map(|value| DetectedLabel::from_attribute(as_map(value)?))
                .collect::<Result<_, _>>()?,
        })
    }
}

impl DetectedLabel {
    fn to_attribute(&self) -> AttributeValue {
        let mut map = Item::new();
        map.insert(
            LabelAttribute::Name.to_string(),
            AttributeValue::S(self.name.clone()),
        );
        insert_number(&mut map, LabelAttribute::Confidence, self.confidence);
        map.insert(
            LabelAttribute::Instances.to_string(),
            AttributeValue::L(self.instances.iter().map(LabelInstance::to_attribute).collect()),
        );
        map.insert(LabelAttribute::Parents.to_string(), names(&self.parents));
        map.insert(LabelAttribute::Aliases.to_string(), names(&self.aliases));
        map.insert(LabelAttribute::Categories.to_string(), names(&self.categories));
        AttributeValue::M(map)
    }

    fn from_attribute(map: &Item) -> Result<Self, LabelTableError> {
        Ok(Self {
            name: string_attr(map, &LabelAttribute::Name.to_string())?,
            confidence: number_attr(map, LabelAttribute::Confidence)?,
            instances: list_attr(map, &LabelAttribute::Instances.to_string())?
                .iter()
                .map(|value| LabelInstance::from_attribute(as_map(value)?))
                .collect::<Result<_, _>>()?,
            parents: names_attr(map, LabelAttribute::Parents)?,
            aliases: names_attr(map, LabelAttribute::Aliases)?,
            categories: names_attr(map, LabelAttribute::Categories)?,
        })
    }
}

impl LabelInstance {
    fn to_attribute(&self) -> AttributeValue {
        let mut map = Item::new();
        if let Some(bounding_box) = &self.bounding_box {
            let mut box_map = Item::new();
            insert_number(&mut box_map, LabelAttribute::Width, bounding_box.width);
            insert_number(&mut box_map, LabelAttribute::Height, bounding_box.height);
            insert_number(&mut box_map, LabelAttribute::Left, bounding_box.left);
            insert_number(&mut box_map, LabelAttribute::Top, bounding_box.top);
            map.insert(
                LabelAttribute::BoundingBox.to_string(),
                AttributeValue::M(box_map),
            );
        }
        insert_number(&mut map, LabelAttribute::Confidence, self.confidence);
        AttributeValue::M(map)
    }

    fn from_attribute(map: &Item) -> Result<Self, LabelTableError> {
        let bounding_box = map
            .get(&LabelAttribute::BoundingBox.to_string())
            .map(|value| {
                let box_map = as_map(value)?;
                Ok::<_, LabelTableError>(BoundingBox {
                    width: number_attr(box_map, LabelAttribute::Width)?,
                    height: number_attr(box_map, LabelAttribute::Height)?,
                    left: number_attr(box_map, LabelAttribute::Left)?,
                    top: number_attr(box_map, LabelAttribute::Top)?,
                })
            })
            .transpose()?;

        Ok(Self {
            bounding_box,
            confidence: number_attr(map, LabelAttribute::Confidence)?,
        })
    }
}

fn insert_number(map: &mut Item, attribute: LabelAttribute, value: Option<Decimal>) {
    if let Some(value) = value {
        map.insert(attribute.to_string(), AttributeValue::N(value.to_string()));
    }
}

fn names(values: &[String]) -> AttributeValue {
    AttributeValue::L(
        values
            .iter()
            .map(|name| {
                AttributeValue::M(HashMap::from([(
                    LabelAttribute::Name.to_string(),
                    AttributeValue::S(name.clone()),
                )]))
            })
            .collect(),
    )
}

fn malformed(name: &str) -> LabelTableError {
    LabelTableError::SerializationError(format!("attribute '{name}' is missing or malformed"))
}

fn as_map(value: &AttributeValue) -> Result<&Item, LabelTableError> {
    value
        .as_m()
        .map_err(|_| LabelTableError::SerializationError("expected a map attribute".to_string()))
}

fn string_attr(map: &Item, name: &str) -> Result<String, LabelTableError> {
    map.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| malformed(name))
}

fn list_attr<'a>(map: &'a Item, name: &str) -> Result<&'a [AttributeValue], LabelTableError> {
    match map.get(name) {
        None => Ok(&[]),
        Some(value) => value
            .as_l()
            .map(Vec::as_slice)
            .map_err(|_| malformed(name)),
    }
}

fn number_attr(map: &Item, attribute: LabelAttribute) -> Result<Option<Decimal>, LabelTableError> {
    let name = attribute.to_string();
    map.get(&name)
        .map(|value| {
            let number = value.as_n().map_err(|_| malformed(&name))?;
            Decimal::from_str(number).map_err(|e| {
                LabelTableError::SerializationError(format!("attribute '{name}': {e}"))
            })
        })
        .transpose()
}

fn names_attr(map: &Item, attribute: LabelAttribute) -> Result<Vec<String>, LabelTableError> {
    let name = attribute.to_string();
    list_attr(map, &name)?
        .iter()
        .map(|value| string_attr(as_map(value)?, &LabelAttribute::Name.to_string()))
        .collect()
}
