//! 分片参数校验

use std::ops::RangeInclusive;

use shardbot_errors::{AppError, AppResult};

/// 命令行提供的原始分片参数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShardArgs {
    pub count: Option<u32>,
    pub min: Option<u32>,
    pub max: Option<u32>,
}

/// 校验后的分片配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSpec {
    count: u32,
    min: u32,
    max: u32,
}

impl ShardSpec {
    /// 单分片：`count = 1`，只运行分片 0
    pub fn single() -> Self {
        Self {
            count: 1,
            min: 0,
            max: 0,
        }
    }

    /// 总分片数
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn range(&self) -> RangeInclusive<u32> {
        self.min..=self.max
    }

    /// 本进程负责的分片 id，升序
    pub fn ids(&self) -> Vec<u32> {
        self.range().collect()
    }

    /// 本进程负责的分片数，`0..=u32::MAX` 时为 2^32
    pub fn assigned(&self) -> u64 {
        u64::from(self.max - self.min) + 1
    }

    pub fn contains(&self, id: u32) -> bool {
        self.range().contains(&id)
    }
}

impl Default for ShardSpec {
    fn default() -> Self {
        Self::single()
    }
}

/// 校验分片参数
///
/// 未指定 `count` 时忽略 `min`/`max`，退化为单分片。
/// 指定了 `count` 就必须同时给出 `min` 和 `max`，且 `min <= max`。
pub fn validate_shards(args: ShardArgs) -> AppResult<ShardSpec> {
    let Some(count) = args.count else {
        return Ok(ShardSpec::single());
    };

    let (Some(min), Some(max)) = (args.min, args.max) else {
        let missing = match (args.min, args.max) {
            (None, None) => "min and max",
            (None, Some(_)) => "min",
            _ => "max",
        };
        return Err(AppError::shard_config(format!(
            "You set a shardcount but not min/max shards (missing {})",
            missing
        )));
    };

    if min > max {
        return Err(AppError::shard_config(format!(
            "Shard range is empty: min {} is greater than max {}",
            min, max
        )));
    }

    Ok(ShardSpec { count, min, max })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_count_defaults_to_single_shard() {
        let spec = validate_shards(ShardArgs::default()).unwrap();
        assert_eq!(spec.count(), 1);
        assert_eq!(spec.ids(), vec![0]);

        // 没有 count 时 min/max 被忽略
        let spec = validate_shards(ShardArgs {
            count: None,
            min: Some(3),
            max: Some(7),
        })
        .unwrap();
        assert_eq!(spec, ShardSpec::single());
    }

    #[test]
    fn test_count_with_range() {
        let spec = validate_shards(ShardArgs {
            count: Some(4),
            min: Some(0),
            max: Some(3),
        })
        .unwrap();
        assert_eq!(spec.count(), 4);
        assert_eq!(spec.ids(), vec![0, 1, 2, 3]);
        assert_eq!(spec.assigned(), 4);
        assert!(spec.contains(3));
        assert!(!spec.contains(4));
    }

    #[test]
    fn test_single_id_range() {
        let spec = validate_shards(ShardArgs {
            count: Some(10),
            min: Some(5),
            max: Some(5),
        })
        .unwrap();
        assert_eq!(spec.ids(), vec![5]);
        assert_eq!(spec.assigned(), 1);
    }

    #[test]
    fn test_full_u32_range_does_not_overflow() {
        let spec = validate_shards(ShardArgs {
            count: Some(1),
            min: Some(0),
            max: Some(u32::MAX),
        })
        .unwrap();
        assert_eq!(spec.assigned(), 1 << 32);
        assert_eq!(spec.range(), 0..=u32::MAX);
        assert!(spec.contains(u32::MAX));
    }

    #[test]
    fn test_count_without_bounds_fails() {
        for (min, max) in [(None, None), (Some(0), None), (None, Some(3))] {
            let err = validate_shards(ShardArgs {
                count: Some(4),
                min,
                max,
            })
            .unwrap_err();
            assert!(err.is_shard_config());
            assert!(err.to_string().contains("You set a shardcount but not min/max shards"));
        }
    }

    #[test]
    fn test_inverted_range_fails() {
        let err = validate_shards(ShardArgs {
            count: Some(4),
            min: Some(3),
            max: Some(1),
        })
        .unwrap_err();
        assert!(err.is_shard_config());
    }
}
