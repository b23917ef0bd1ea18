use chrono::{DateTime, Local};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// 一条测试用例
///
/// 字段名到字段值的有序映射，字段集合由所用的提示词模板决定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCase {
    fields: Vec<(String, String)>,
}

impl TestCase {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取字段值
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 设置字段值，已存在的字段保持原位置
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TestCase {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut case = TestCase::new();
        for (k, v) in iter {
            case.set(k, v);
        }
        case
    }
}

impl Serialize for TestCase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// 一次生成得到的全部测试用例
///
/// 所有记录拥有与表头完全相同的字段集合
#[derive(Debug, Clone)]
pub struct Batch {
    header: Vec<String>,
    records: Vec<TestCase>,
    /// 派生的通过/失败标记，仅在勾选模式下存在
    verdicts: Option<Vec<bool>>,
    generated_at: DateTime<Local>,
}

impl Batch {
    /// 用表头和记录构建批次
    ///
    /// 缺失的字段补空字符串，多余的字段被丢弃，字段顺序与表头一致
    pub fn new(header: Vec<String>, records: Vec<TestCase>) -> Self {
        let records = records
            .into_iter()
            .map(|record| {
                header
                    .iter()
                    .map(|name| (name.clone(), record.get(name).unwrap_or_default().to_string()))
                    .collect()
            })
            .collect();

        Self {
            header,
            records,
            verdicts: None,
            generated_at: Local::now(),
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn records(&self) -> &[TestCase] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generated_at(&self) -> DateTime<Local> {
        self.generated_at
    }

    pub fn verdicts(&self) -> Option<&[bool]> {
        self.verdicts.as_deref()
    }

    /// 设置整批的派生标记
    pub fn set_verdicts(&mut self, verdicts: Vec<bool>) {
        debug_assert_eq!(verdicts.len(), self.records.len());
        self.verdicts = Some(verdicts);
    }

    /// 用户在表格中手动修改标记
    ///
    /// 返回是否有标记被改变
    pub fn override_verdicts(&mut self, checked: &[bool]) -> bool {
        let Some(verdicts) = self.verdicts.as_mut() else {
            return false;
        };
        let mut changed = false;
        for (slot, &value) in verdicts.iter_mut().zip(checked) {
            if *slot != value {
                *slot = value;
                changed = true;
            }
        }
        changed
    }

    /// 按表头顺序取出某条记录的所有值
    pub fn row(&self, index: usize) -> Option<Vec<&str>> {
        let record = self.records.get(index)?;
        Some(
            self.header
                .iter()
                .map(|name| record.get(name).unwrap_or_default())
                .collect(),
        )
    }
}
