use std::collections::HashSet;

/// 名称与编号共用的消歧格式：`"{base} ({n})"`。
fn disambiguate(base: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(base) {
        return base.to_string();
    }
    let mut n: u64 = 1;
    loop {
        let candidate = format!("{base} ({n})");
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// 生成与 `existing` 不冲突的图纸名称。
pub fn unique_name(base: &str, existing: &HashSet<String>) -> String {
    disambiguate(base, existing)
}

/// 生成与 `existing` 不冲突的图纸编号，格式与名称一致。
pub fn unique_number(base: &str, existing: &HashSet<String>) -> String {
    disambiguate(base, existing)
}
