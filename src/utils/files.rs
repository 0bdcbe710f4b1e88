use crate::utils::{ bucket::CountryBuckets, errors::AppError, models::CsvRow };

use csv::Writer;
use std::{ fs::{ self, File }, io, path::Path };

// 按行拆分，去掉空行和行首尾空白
pub fn non_empty_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// 展开所有分组，每条一行，行与行之间用 "\n" 连接，末尾不加换行；没有记录时为空字符串
pub fn serialize(buckets: &CountryBuckets) -> String {
    buckets
        .records()
        .map(|record| record.to_line())
        .collect::<Vec<_>>()
        .join("\n")
}

// 直接覆盖写入（不是原子写入）
pub fn write_output<P>(path: P, buckets: &CountryBuckets) -> io::Result<()> where P: AsRef<Path> {
    fs::write(path, serialize(buckets))
}

// 写一个空文件，获取列表失败时使用
pub fn write_empty<P>(path: P) -> io::Result<()> where P: AsRef<Path> {
    File::create(path)?;
    Ok(())
}

pub fn write_to_csv<P>(csv_file: P, buckets: &CountryBuckets) -> Result<(), AppError>
    where P: AsRef<Path>
{
    let file = File::create(csv_file)?;
    let mut wtr = Writer::from_writer(file);
    for record in buckets.records() {
        wtr.serialize(CsvRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}
