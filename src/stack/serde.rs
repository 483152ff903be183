use super::Stack;

impl<'de> serde::Deserialize<'de> for Stack {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        const FIELDS: &[&str] = &["depth", "height", "width", "v"];
        enum Field {
            Depth,
            Height,
            Width,
            V,
        }

        impl<'de> serde::Deserialize<'de> for Field {
            fn deserialize<D>(deserializer: D) -> Result<Field, D::Error>
            where
                D: serde::de::Deserializer<'de>,
            {
                struct FieldVisitor;

                impl<'de> serde::de::Visitor<'de> for FieldVisitor {
                    type Value = Field;

                    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                        formatter.write_str("`depth`, `height`, `width` or `v`")
                    }

                    fn visit_str<E>(self, value: &str) -> Result<Field, E>
                    where
                        E: serde::de::Error,
                    {
                        match value {
                            "depth" => Ok(Field::Depth),
                            "height" => Ok(Field::Height),
                            "width" => Ok(Field::Width),
                            "v" => Ok(Field::V),
                            _ => Err(serde::de::Error::unknown_field(value, FIELDS)),
                        }
                    }
                }

                deserializer.deserialize_identifier(FieldVisitor)
            }
        }

        struct StackVisitor;

        impl<'de> serde::de::Visitor<'de> for StackVisitor {
            type Value = Stack;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("struct Stack")
            }

            fn visit_seq<V>(self, mut seq: V) -> Result<Stack, V::Error>
            where
                V: serde::de::SeqAccess<'de>,
            {
                let depth: usize = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
                let height: usize = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
                let width: usize = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(2, &self))?;
                let v: Vec<crate::Float> = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(3, &self))?;
                if v.len() != depth * height * width {
                    return Err(serde::de::Error::custom(format!(
                        "voxel buffer has {} values for a {}x{}x{} stack",
                        v.len(),
                        depth,
                        height,
                        width
                    )));
                }
                Ok(Stack {
                    depth,
                    height,
                    width,
                    v,
                })
            }

            fn visit_map<V>(self, mut map: V) -> Result<Stack, V::Error>
            where
                V: serde::de::MapAccess<'de>,
            {
                let mut depth = None;
                let mut height = None;
                let mut width = None;
                let mut v = None;
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Depth => {
                            if depth.is_some() {
                                return Err(serde::de::Error::duplicate_field("depth"));
                            }
                            depth = Some(map.next_value()?);
                        }
                        Field::Height => {
                            if height.is_some() {
                                return Err(serde::de::Error::duplicate_field("height"));
                            }
                            height = Some(map.next_value()?);
                        }
                        Field::Width => {
                            if width.is_some() {
                                return Err(serde::de::Error::duplicate_field("width"));
                            }
                            width = Some(map.next_value()?);
                        }
                        Field::V => {
                            if v.is_some() {
                                return Err(serde::de::Error::duplicate_field("v"));
                            }
                            v = Some(map.next_value()?);
                        }
                    }
                }
                let depth: usize = depth.ok_or_else(|| serde::de::Error::missing_field("depth"))?;
                let height: usize =
                    height.ok_or_else(|| serde::de::Error::missing_field("height"))?;
                let width: usize = width.ok_or_else(|| serde::de::Error::missing_field("width"))?;
                let v: Vec<crate::Float> = v.ok_or_else(|| serde::de::Error::missing_field("v"))?;
                if v.len() != depth * height * width {
                    return Err(serde::de::Error::custom(format!(
                        "voxel buffer has {} values for a {}x{}x{} stack",
                        v.len(),
                        depth,
                        height,
                        width
                    )));
                }
                Ok(Stack {
                    depth,
                    height,
                    width,
                    v,
                })
            }
        }

        deserializer.deserialize_struct("Stack", FIELDS, StackVisitor)
    }
}
