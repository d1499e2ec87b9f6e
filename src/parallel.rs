use std::thread;

use tracing::debug;

use crate::{DataSet, GenDataError, Result};

/// Number of rows a worker processes between calls to
/// [`ParallelProcessor::on_batch_complete`].
pub const ROW_BATCH_SIZE: usize = 64 * 1024;

/// Trait for types that can process Data Set rows in parallel.
///
/// This is implemented by the **processor** not by the **reader**.
/// For the **reader**, see the [`ParallelReader`] trait.
pub trait ParallelProcessor: Send + Clone {
    /// Process a single row of `data_set`.
    ///
    /// `data_set` is the worker's own open view, so cells are read with the
    /// usual typed getters.
    fn process_row(&mut self, data_set: &mut DataSet, row: usize) -> Result<()>;

    /// Called when a thread finishes a batch of rows
    /// Default implementation does nothing
    fn on_batch_complete(&mut self) -> Result<()> {
        Ok(())
    }

    /// Set the thread ID for this processor
    ///
    /// Each worker calls this with its own index before processing.
    #[allow(unused_variables)]
    fn set_tid(&mut self, tid: usize) {}

    /// Get the thread ID for this processor
    fn get_tid(&self) -> Option<usize> {
        None
    }
}

/// Trait for readers whose rows can be processed in parallel
///
/// This is implemented by the **reader** not by the **processor**.
/// For the **processor**, see the [`ParallelProcessor`] trait.
pub trait ParallelReader {
    /// Splits the rows into contiguous ranges, one per thread.
    ///
    /// `num_threads == 0` uses every available core.
    fn process_parallel<P: ParallelProcessor + 'static>(
        &self,
        processor: P,
        num_threads: usize,
    ) -> Result<()>;
}

impl ParallelReader for DataSet {
    fn process_parallel<P: ParallelProcessor + 'static>(
        &self,
        processor: P,
        num_threads: usize,
    ) -> Result<()> {
        if !self.is_open() {
            return Err(GenDataError::DataSetNotOpen(self.name().to_string()));
        }
        let rows = self.rows();
        if rows == 0 {
            return Ok(());
        }
        let num_threads = if num_threads == 0 {
            num_cpus::get()
        } else {
            num_threads.min(num_cpus::get())
        }
        .clamp(1, rows);
        let rows_per_thread = rows / num_threads;
        let remainder = rows % num_threads;
        debug!(name = self.name(), rows, num_threads, "processing rows in parallel");

        let mut handles = Vec::with_capacity(num_threads);
        for i in 0..num_threads {
            let start = i * rows_per_thread;
            let end = if i == num_threads - 1 {
                start + rows_per_thread + remainder
            } else {
                start + rows_per_thread
            };
            let mut view = self.fork()?;
            let mut thread_processor = processor.clone();
            thread_processor.set_tid(i);
            let handle = thread::spawn(move || -> Result<()> {
                let mut batch_start = start;
                while batch_start < end {
                    let batch_end = (batch_start + ROW_BATCH_SIZE).min(end);
                    for row in batch_start..batch_end {
                        thread_processor.process_row(&mut view, row)?;
                    }
                    thread_processor.on_batch_complete()?;
                    batch_start = batch_end;
                }
                Ok(())
            });
            handles.push(handle);
        }

        for (i, handle) in handles.into_iter().enumerate() {
            handle.join().map_err(|_| GenDataError::WorkerPanicked(i))??;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{scenario_file, scenario_value, SCENARIO_ROWS},
        GenericData,
    };
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct ColumnSum {
        local: u64,
        rows: usize,
        tid: Option<usize>,
        total: Arc<Mutex<(u64, usize)>>,
        tids: Arc<Mutex<Vec<usize>>>,
    }

    impl ParallelProcessor for ColumnSum {
        fn process_row(&mut self, data_set: &mut DataSet, row: usize) -> Result<()> {
            self.local += data_set.get_u16(row, 0)? as u64;
            self.rows += 1;
            Ok(())
        }

        fn on_batch_complete(&mut self) -> Result<()> {
            let mut total = self.total.lock();
            total.0 += self.local;
            total.1 += self.rows;
            self.local = 0;
            self.rows = 0;
            if let Some(tid) = self.tid {
                self.tids.lock().push(tid);
            }
            Ok(())
        }

        fn set_tid(&mut self, tid: usize) {
            self.tid = Some(tid);
        }

        fn get_tid(&self) -> Option<usize> {
            self.tid
        }
    }

    #[test]
    fn test_parallel_sum_matches_sequential() {
        let file = scenario_file();
        let data = GenericData::open(file.path()).unwrap();
        let ds = data.data_set(0, 1).unwrap();
        let expected: u64 = (0..SCENARIO_ROWS)
            .map(|row| scenario_value(1, row).0 as u64)
            .sum();

        for threads in [0, 1, 3, 64] {
            let processor = ColumnSum::default();
            ds.process_parallel(processor.clone(), threads).unwrap();
            assert_eq!(*processor.total.lock(), (expected, SCENARIO_ROWS));
            assert!(!processor.tids.lock().is_empty());
        }
    }

    #[test]
    fn test_parallel_leaves_source_view_usable() {
        let file = scenario_file();
        let data = GenericData::open(file.path()).unwrap();
        let mut ds = data.data_set(0, 2).unwrap();
        ds.process_parallel(ColumnSum::default(), 2).unwrap();
        assert_eq!(ds.get_u16(3, 0).unwrap(), scenario_value(2, 3).0);
    }

    #[test]
    fn test_closed_data_set_is_not_processed() {
        let file = scenario_file();
        let data = GenericData::open(file.path()).unwrap();
        let mut ds = data.data_set(0, 0).unwrap();
        ds.close();

        let processor = ColumnSum::default();
        assert!(matches!(
            ds.process_parallel(processor.clone(), 2),
            Err(GenDataError::DataSetNotOpen(_))
        ));
        assert_eq!(*processor.total.lock(), (0, 0));
        assert!(matches!(ds.fork(), Err(GenDataError::DataSetNotOpen(_))));

        ds.open().unwrap();
        ds.process_parallel(processor.clone(), 2).unwrap();
        assert_eq!(processor.total.lock().1, SCENARIO_ROWS);
    }

    #[derive(Clone)]
    struct FailAt(usize);

    impl ParallelProcessor for FailAt {
        fn process_row(&mut self, data_set: &mut DataSet, row: usize) -> Result<()> {
            if row == self.0 {
                // column 5 does not exist
                data_set.get_u16(row, 5)?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_worker_error_is_returned() {
        let file = scenario_file();
        let data = GenericData::open(file.path()).unwrap();
        let ds = data.data_set(0, 0).unwrap();
        assert!(matches!(
            ds.process_parallel(FailAt(7), 2),
            Err(GenDataError::ColumnIndexOutOfBounds { col: 5, .. })
        ));
    }

    #[derive(Clone)]
    struct PanicAt(usize);

    impl ParallelProcessor for PanicAt {
        fn process_row(&mut self, _data_set: &mut DataSet, row: usize) -> Result<()> {
            if row == self.0 {
                panic!("row {}", row);
            }
            Ok(())
        }
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let file = scenario_file();
        let data = GenericData::open(file.path()).unwrap();
        let ds = data.data_set(0, 0).unwrap();
        assert!(matches!(
            ds.process_parallel(PanicAt(0), 1),
            Err(GenDataError::WorkerPanicked(0))
        ));
    }
}
