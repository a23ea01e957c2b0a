//! 绑定图单元测试

mod resolver_tests;
