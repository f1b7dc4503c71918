//! Pre-built profile reports and runners for testing.
//!
//! These mirror what `gluster volume profile <vol> info cumulative` prints
//! on a replicated volume.

use super::runner::MockRunner;

/// Two bricks, three fops each, plus read/write totals.
pub const TYPICAL_PROFILE: &str = "\
Brick: server1:/data/brick1/vol0
--------------------------------
Cumulative Stats:
   Block Size:               4096b+               8192b+
 No. of Reads:                  1024                  512
No. of Writes:                   128                   64
 %-latency   Avg-latency   Min-Latency   Max-Latency   No. of calls         Fop
 ---------   -----------   -----------   -----------   ------------        ----
     45.61     123.45 us      12.00 us    9876.00 us           1092      LOOKUP
     30.12     456.78 us      20.00 us   15000.00 us           1536        READ
     24.27     789.01 us      35.00 us   22000.00 us            192       WRITE

    Duration: 335 seconds
   Data Read: 104857600 bytes
Data Written: 1048576 bytes

Brick: server2:/data/brick1/vol0
--------------------------------
Cumulative Stats:
   Block Size:               4096b+
 No. of Reads:                   512
No. of Writes:                   256
 %-latency   Avg-latency   Min-Latency   Max-Latency   No. of calls         Fop
 ---------   -----------   -----------   -----------   ------------        ----
      0.00       0.00 us       0.00 us       0.00 us              4      FORGET
     60.50     210.00 us      15.00 us   12000.00 us            512        READ
     39.50     640.25 us      30.00 us   18000.00 us            256       WRITE

    Duration: 335 seconds
   Data Read: 52428800 bytes
Data Written: 2097152 bytes

";

/// One brick whose READ line carries a garbled average latency.
pub const GARBLED_PROFILE: &str = "\
Brick: server1:/data/brick1/logs
--------------------------------
Cumulative Stats:
 %-latency   Avg-latency   Min-Latency   Max-Latency   No. of calls         Fop
 ---------   -----------   -----------   -----------   ------------        ----
    100.00       n/a us      10.00 us      90.00 us             12        READ

    Duration: 60 seconds
   Data Read: 4096 bytes
Data Written: 0 bytes
";

#[allow(dead_code)]
impl MockRunner {
    /// `vol0` answers with [`TYPICAL_PROFILE`].
    pub fn typical_cluster() -> Self {
        let mut runner = Self::new();
        runner.add_output("vol0", TYPICAL_PROFILE);
        runner
    }

    /// `vol0` is healthy, `logs` has a garbled column.
    pub fn two_volumes() -> Self {
        let mut runner = Self::typical_cluster();
        runner.add_output("logs", GARBLED_PROFILE);
        runner
    }

    /// Profiling is not started on `vol0`, so gluster exits with an error.
    pub fn profiling_disabled() -> Self {
        let mut runner = Self::new();
        runner.add_failure(
            "vol0",
            255,
            "Profile on Volume vol0 is not started",
        );
        runner
    }
}
