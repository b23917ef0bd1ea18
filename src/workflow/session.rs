//! 会话状态
//!
//! 只保存当前交互的一批用例，新的生成或重置都会丢弃旧结果

use crate::error::{AppResult, BusinessError};
use crate::models::{Batch, GenerationRequest};
use crate::workflow::Generation;

/// 当前会话
#[derive(Debug, Default)]
pub struct Session {
    current: Option<(GenerationRequest, Generation)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用新的生成结果替换旧结果
    pub fn replace(&mut self, request: GenerationRequest, generation: Generation) {
        self.current = Some((request, generation));
    }

    /// 清空会话
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn request(&self) -> Option<&GenerationRequest> {
        self.current.as_ref().map(|(request, _)| request)
    }

    pub fn generation(&self) -> Option<&Generation> {
        self.current.as_ref().map(|(_, generation)| generation)
    }

    /// 用户在表格中修改通过/失败标记
    pub fn override_verdicts(&mut self, checked: &[bool]) -> bool {
        match self.current.as_mut() {
            Some((_, Generation::Table(batch))) => batch.override_verdicts(checked),
            _ => false,
        }
    }

    /// 获取可导出的用例
    ///
    /// 没有解析成功的记录时拒绝导出
    pub fn exportable(&self) -> AppResult<(&GenerationRequest, &Batch)> {
        match &self.current {
            Some((request, Generation::Table(batch))) if !batch.is_empty() => Ok((request, batch)),
            _ => Err(BusinessError::NothingToExport.into()),
        }
    }
}
