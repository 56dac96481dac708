// ==========================================
// 医疗设备DSS - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换Repository错误为用户友好的错误消息
// 约束: 所有错误信息必须包含显式原因 (可解释性)
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    /// 来源关系不可用属硬错误: 核心无法在缺失来源的情况下计算
    #[error("数据来源不可用: {0}")]
    DataSourceUnavailable(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("导出失败: {0}")]
    ExportError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

// 实现 From<RepositoryError>
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::ValidationError(msg)
            | RepositoryError::FieldValueError { message: msg, .. } => {
                ApiError::ValidationError(msg)
            }
            other => ApiError::DataSourceUnavailable(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
