pub mod bucket; // 按国家分组，每组限制条数
pub mod common; // 公共的函数，不好分类，可以迁移到其它项目的可能性高
pub mod config; // 命令行参数和运行配置
pub mod country; // 国家代码、中文名、国旗emoji
pub mod errors; // 错误类型
pub mod files; // 与文件相关，包括结果文件和CSV报告
pub mod logger; // 日志初始化
pub mod models; // 数据结构
pub mod network; // 与IP地址相关的函数
pub mod pipeline; // 整个处理流程
pub mod provider; // 各个地理位置查询接口
pub mod resolver; // 多接口依次查询、重试
pub mod source; // 获取IP列表（文本、HTML表格）
