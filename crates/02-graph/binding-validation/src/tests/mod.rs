//! 校验器单元测试
