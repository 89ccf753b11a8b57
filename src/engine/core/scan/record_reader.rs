use std::io::{BufReader, ErrorKind, Seek, SeekFrom};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::engine::core::column::{CodecContext, OutputForm, RequirementMask, RowDecoder};
use crate::engine::core::dictionary::{ComplexDecoderProvider, DictionaryCache};
use crate::engine::core::filter::{FilterExecutor, FilterRow};
use crate::engine::core::read::sink::{ColumnarBatchSink, NoopBatchSink, OutputSchema};
use crate::engine::core::scan::{OutputMode, ScanMetrics, ScanRequest, is_scan_required};
use crate::engine::core::stream::{BlockletReader, SegmentSource, StreamSplit};
use crate::engine::errors::ScanError;
use crate::engine::schema::SegmentSchema;
use crate::engine::types::Value;
use crate::shared::config::{CONFIG, DirectDictionaryConfig, ScanConfig};
use crate::shared::storage_header::StreamFileHeader;

type Input<Src> = BufReader<<Src as SegmentSource>::Stream>;

/// Everything that exists only after the byte stream is opened.
struct OpenScan<Src: SegmentSource> {
    reader: BlockletReader<Input<Src>>,
    decoder: RowDecoder,
    filter: Option<Arc<dyn FilterExecutor>>,
    filter_row: FilterRow,
    output: Vec<Value>,
    dimension_ordinal_max: usize,
    /// Nothing to decode: rows are counted, payloads skipped
    skip_scan_data: bool,
    in_blocklet: bool,
}

/// Scan cursor over one split of a streaming segment.
///
/// The byte stream is opened lazily on the first `next`. Row and raw modes
/// return after every accepted row; columnar mode returns after every
/// blocklet that put at least one row into the sink. The cursor is owned by one caller and is
/// never shared.
pub struct StreamRecordReader<Src: SegmentSource, S: ColumnarBatchSink = NoopBatchSink> {
    source: Src,
    split: StreamSplit,
    schema: Arc<SegmentSchema>,
    request: ScanRequest,
    mode: OutputMode<S>,
    config: ScanConfig,
    direct: DirectDictionaryConfig,
    dictionary: Option<Arc<dyn DictionaryCache>>,
    complex: Option<Arc<dyn ComplexDecoderProvider>>,
    open: Option<OpenScan<Src>>,
    output_schema: Option<OutputSchema>,
    metrics: ScanMetrics,
    finished: bool,
    /// Set by the first error; the cursor position is no longer trusted.
    failed: bool,
    closed: bool,
}

impl<Src: SegmentSource> StreamRecordReader<Src> {
    pub fn rows(
        source: Src,
        split: StreamSplit,
        schema: Arc<SegmentSchema>,
        request: ScanRequest,
    ) -> Self {
        Self::new(source, split, schema, request, OutputMode::Row)
    }

    /// Hand-off scan: every storage column in stored form. The projection of
    /// `request` is ignored; its filter still applies.
    pub fn raw(
        source: Src,
        split: StreamSplit,
        schema: Arc<SegmentSchema>,
        request: ScanRequest,
    ) -> Self {
        Self::new(source, split, schema, request, OutputMode::Raw)
    }
}

impl<Src: SegmentSource, S: ColumnarBatchSink> StreamRecordReader<Src, S> {
    pub fn columnar(
        source: Src,
        split: StreamSplit,
        schema: Arc<SegmentSchema>,
        request: ScanRequest,
        sink: S,
    ) -> Self {
        Self::new(source, split, schema, request, OutputMode::Columnar(sink))
    }

    pub fn new(
        source: Src,
        split: StreamSplit,
        schema: Arc<SegmentSchema>,
        request: ScanRequest,
        mode: OutputMode<S>,
    ) -> Self {
        Self {
            source,
            split,
            schema,
            request,
            mode,
            config: CONFIG.scan.clone(),
            direct: CONFIG.direct_dictionary.clone(),
            dictionary: None,
            complex: None,
            open: None,
            output_schema: None,
            metrics: ScanMetrics::default(),
            finished: false,
            failed: false,
            closed: false,
        }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_direct_dictionary(mut self, direct: DirectDictionaryConfig) -> Self {
        self.direct = direct;
        self
    }

    pub fn with_dictionary_cache(mut self, cache: Arc<dyn DictionaryCache>) -> Self {
        self.dictionary = Some(cache);
        self
    }

    pub fn with_complex_decoders(mut self, provider: Arc<dyn ComplexDecoderProvider>) -> Self {
        self.complex = Some(provider);
        self
    }

    /// Advances to the next accepted row (row and raw modes) or the next
    /// non-empty blocklet batch (columnar mode). `Ok(false)` once the split
    /// is done. Any error is fatal: later calls return `Aborted`.
    pub fn next(&mut self) -> Result<bool, ScanError> {
        if self.closed {
            return Err(ScanError::Closed);
        }
        if self.failed {
            return Err(ScanError::Aborted);
        }
        if self.finished {
            return Ok(false);
        }

        match self.advance() {
            Ok(false) => {
                self.finished = true;
                info!(
                    target: "segment_stream::scan",
                    source = %self.source.describe(),
                    mode = self.mode.name(),
                    blocklets = self.metrics.blocklets_seen,
                    pruned = self.metrics.blocklets_pruned,
                    records = self.metrics.records_read,
                    "Split scan finished"
                );
                Ok(false)
            }
            Ok(true) => Ok(true),
            Err(e) => {
                self.failed = true;
                e.log_error();
                Err(e)
            }
        }
    }

    fn advance(&mut self) -> Result<bool, ScanError> {
        if self.open.is_none() {
            self.setup()?;
        }
        if self.mode.is_columnar() {
            self.next_batch()
        } else {
            self.next_row()
        }
    }

    /// Values of the row `next` stopped at: projected columns in projection
    /// order, or the full storage tuple in raw mode. Empty before the first
    /// row and in columnar mode.
    pub fn current_row(&self) -> &[Value] {
        match (&self.open, &self.mode) {
            (_, OutputMode::Columnar(_)) | (None, _) => &[],
            (Some(open), _) => &open.output,
        }
    }

    pub fn output_schema(&self) -> Option<&OutputSchema> {
        self.output_schema.as_ref()
    }

    pub fn schema(&self) -> &SegmentSchema {
        &self.schema
    }

    pub fn split(&self) -> StreamSplit {
        self.split
    }

    pub fn sink(&self) -> Option<&S> {
        match &self.mode {
            OutputMode::Columnar(sink) => Some(sink),
            _ => None,
        }
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        match &mut self.mode {
            OutputMode::Columnar(sink) => Some(sink),
            _ => None,
        }
    }

    pub fn metrics(&self) -> ScanMetrics {
        self.metrics
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Fraction of the split consumed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.finished {
            return 1.0;
        }
        match &self.open {
            Some(open) if self.split.length > 0 => {
                (open.reader.position() as f64 / self.split.length as f64).clamp(0.0, 1.0) as f32
            }
            _ => 0.0,
        }
    }

    /// Releases the byte stream and closes the sink. Cleanup failures are
    /// logged, never returned.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.open = None;
        if let OutputMode::Columnar(sink) = &mut self.mode {
            if let Err(e) = sink.close() {
                error!(
                    target: "segment_stream::scan",
                    source = %self.source.describe(),
                    error = %e,
                    "Failed to close batch sink"
                );
            }
        }
        debug!(target: "segment_stream::scan", metrics = ?self.metrics, "Scan closed");
    }

    fn setup(&mut self) -> Result<(), ScanError> {
        let mut stream = self.source.open()?;
        let (header, layout) =
            StreamFileHeader::read_with_layout(&mut stream, self.config.verify_header_crc)
                .map_err(header_error)?;
        if header.column_count as usize != self.schema.len() {
            return Err(ScanError::SchemaMismatch {
                expected: self.schema.len(),
                found: header.column_count as usize,
            });
        }

        stream.seek(SeekFrom::Start(self.split.start))?;
        let input = BufReader::with_capacity(self.config.read_buffer_size, stream);
        // A split that starts at or before the header's own marker copy would
        // otherwise take it for a blocklet boundary.
        let is_header_present = self.split.start <= layout.marker_offset;
        let reader = BlockletReader::new(
            header.sync_marker,
            input,
            self.split.length,
            is_header_present,
        );

        let filter_columns = self.request.filter_columns();
        let (mask, form, output_schema) = if self.mode.is_raw() {
            (
                RequirementMask::raw(&self.schema, &filter_columns)?,
                OutputForm::Raw,
                OutputSchema::raw(&self.schema),
            )
        } else {
            (
                RequirementMask::build(&self.schema, &filter_columns, &self.request.projection)?,
                OutputForm::Typed,
                OutputSchema::projected(&self.schema, &self.request.projection)?,
            )
        };

        let ctx = CodecContext {
            direct: &self.direct,
            dictionary: self.dictionary.as_deref(),
            complex: self.complex.as_deref(),
        };
        let decoder = RowDecoder::new(&self.schema, &mask, form, ctx)?;

        if let OutputMode::Columnar(sink) = &mut self.mode {
            sink.on_schema(&output_schema)?;
        }

        let skip_scan_data =
            self.request.filter.is_none() && mask.nothing_required() && !self.mode.is_raw();
        debug!(
            target: "segment_stream::scan",
            source = %self.source.describe(),
            start = self.split.start,
            length = self.split.length,
            mode = self.mode.name(),
            required = mask.required_count(),
            skip_scan_data,
            "Opened split"
        );

        self.open = Some(OpenScan {
            reader,
            decoder,
            filter: self.request.filter.clone(),
            filter_row: FilterRow::new(mask.filter_row_len()),
            output: vec![Value::Null; mask.output_len()],
            dimension_ordinal_max: self.schema.dimension_ordinal_max(),
            skip_scan_data,
            in_blocklet: false,
        });
        self.output_schema = Some(output_schema);
        Ok(())
    }

    fn next_row(&mut self) -> Result<bool, ScanError> {
        let open = self.open.as_mut().ok_or(ScanError::Closed)?;
        loop {
            if !open.in_blocklet || !open.reader.has_next() {
                if open.in_blocklet {
                    open.finish_blocklet()?;
                }
                if open.select_blocklet(&mut self.metrics)?.is_none() {
                    return Ok(false);
                }
                open.in_blocklet = true;
                continue;
            }

            open.reader.next_row();
            if open.skip_scan_data || open.decode_row(&mut self.metrics)? {
                self.metrics.on_records(1);
                return Ok(true);
            }
        }
    }

    fn next_batch(&mut self) -> Result<bool, ScanError> {
        let open = self.open.as_mut().ok_or(ScanError::Closed)?;
        let OutputMode::Columnar(sink) = &mut self.mode else {
            return Ok(false);
        };

        // Blocklets whose rows are all filtered out never reach the caller.
        loop {
            let Some(row_count) = open.select_blocklet(&mut self.metrics)? else {
                return Ok(false);
            };

            sink.set_capacity(row_count)?;
            if open.skip_scan_data {
                sink.finalize_row_count(row_count)?;
                self.metrics.on_records(row_count);
                if row_count > 0 {
                    return Ok(true);
                }
                continue;
            }

            let mut accepted = 0;
            while open.reader.has_next() {
                open.reader.next_row();
                if !open.decode_row(&mut self.metrics)? {
                    continue;
                }
                for (column, value) in open.output.iter_mut().enumerate() {
                    sink.put_value(accepted, std::mem::take(value), column)?;
                }
                accepted += 1;
            }
            open.finish_blocklet()?;

            sink.finalize_row_count(accepted)?;
            self.metrics.on_records(accepted);
            if accepted > 0 {
                return Ok(true);
            }
        }
    }
}

impl<Src: SegmentSource> OpenScan<Src> {
    /// Moves to the next blocklet that has to be visited and returns its row
    /// count. Pruned blocklets are skipped here.
    fn select_blocklet(&mut self, metrics: &mut ScanMetrics) -> Result<Option<usize>, ScanError> {
        while self.reader.next_blocklet()? {
            metrics.on_blocklet();
            let header = self.reader.read_blocklet_header()?;

            if !is_scan_required(self.filter.as_deref(), &header) {
                self.reader.skip_blocklet_data(true)?;
                metrics.on_pruned();
                continue;
            }

            if self.skip_scan_data {
                self.reader.skip_blocklet_data(false)?;
                metrics.on_skipped();
            } else {
                self.reader.read_blocklet_data(&header)?;
            }
            return Ok(Some(header.row_count as usize));
        }
        Ok(None)
    }

    /// Decodes the current row and reports whether the predicate admits it.
    fn decode_row(&mut self, metrics: &mut ScanMetrics) -> Result<bool, ScanError> {
        self.decoder
            .decode_row(&mut self.reader, &mut self.filter_row, &mut self.output)?;
        metrics.on_decoded();

        if let Some(filter) = &self.filter {
            if !filter.apply_filter(&self.filter_row, self.dimension_ordinal_max)? {
                metrics.on_filtered_out();
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Every row of a decoded payload was visited; no byte may be left over.
    fn finish_blocklet(&mut self) -> Result<(), ScanError> {
        self.in_blocklet = false;
        if !self.reader.is_payload_exhausted() {
            return Err(ScanError::corruption(format!(
                "{} trailing bytes after the last row of a blocklet",
                self.reader.payload_len() - self.reader.payload_offset()
            )));
        }
        Ok(())
    }
}

fn header_error(err: std::io::Error) -> ScanError {
    match err.kind() {
        ErrorKind::InvalidData | ErrorKind::UnexpectedEof => {
            ScanError::corruption(format!("stream file header: {err}"))
        }
        _ => ScanError::Io(err),
    }
}
