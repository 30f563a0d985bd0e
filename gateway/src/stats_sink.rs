//! CSV-file [`StatsSink`]. Grounded in `original_source`'s
//! `OrderStatsFileWriterCallback`: header line on open, one flushed
//! line per emitted record, same column order.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use gateway_core::exchange::StatsSink;
use gateway_core::model::{CompletedLatencyRecord, OrderResponse};

const HEADER: &str = "#OrderId,ResponseType,OrderWaitTimeInQueue,OrderRoundTripLatency\n";

/// Appends `order_id,response_type,queue_wait_ns,round_trip_ns` to a
/// file, one line per completed order, flushing after every write so a
/// killed process loses at most the in-flight record.
pub struct CsvStatsSink {
    writer: Mutex<BufWriter<File>>,
}

impl CsvStatsSink {
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        file.write_all(HEADER.as_bytes())?;
        file.flush()?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl StatsSink for CsvStatsSink {
    fn emit(&self, response: &OrderResponse, record: &CompletedLatencyRecord) {
        let mut writer = self.writer.lock().unwrap();
        let _ = writeln!(
            writer,
            "{},{},{},{}",
            response.order_id,
            response.result.as_i32(),
            record.queue_wait_ns(),
            record.round_trip_ns()
        );
        let _ = writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::time::Nanos;
    use gateway_core::model::ResponseResult;
    use std::io::Read;

    #[test]
    fn writes_header_then_one_line_per_record() {
        let path = std::env::temp_dir().join(format!(
            "gateway_csv_stats_sink_test_{}.csv",
            std::process::id()
        ));
        let sink = CsvStatsSink::create(&path).unwrap();

        sink.emit(
            &OrderResponse {
                order_id: 7,
                result: ResponseResult::Accept,
            },
            &CompletedLatencyRecord {
                ingress_time_ns: Nanos::new(0),
                send_time_ns: Nanos::new(100),
                response_time_ns: Nanos::new(250),
            },
        );

        let mut contents = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("#OrderId,ResponseType,OrderWaitTimeInQueue,OrderRoundTripLatency")
        );
        assert_eq!(lines.next(), Some("7,1,100,150"));

        let _ = std::fs::remove_file(&path);
    }
}
