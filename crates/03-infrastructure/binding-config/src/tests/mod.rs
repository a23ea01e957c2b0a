//! 编译选项加载测试
