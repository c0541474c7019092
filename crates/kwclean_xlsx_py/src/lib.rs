use std::collections::BTreeMap;

use kwclean_xlsx::{
    C_EXPORT_FILE_NAME, C_EXPORT_MIME_TYPE, SerializationFault, SpecKeywordCleanRun,
    clean_workbook_bytes, derive_default_keyword_clean_options,
};
use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::PyBytes;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "kwclean.xlsx.clean_keywords.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "KeywordCleanRun")]
#[derive(Debug, Clone)]
struct PyKeywordCleanRun {
    #[pyo3(get)]
    keywords: Vec<String>,
    #[pyo3(get)]
    error: Option<String>,
    #[pyo3(get)]
    message: String,
    #[pyo3(get)]
    file_name: String,
    #[pyo3(get)]
    mime_type: String,
    #[pyo3(get)]
    warnings: Vec<String>,
    counts: BTreeMap<String, u64>,
    export: Vec<u8>,
}

impl From<SpecKeywordCleanRun> for PyKeywordCleanRun {
    fn from(run: SpecKeywordCleanRun) -> Self {
        Self {
            error: run.error().map(ToString::to_string),
            message: run.message(),
            counts: run.report.to_dict(),
            warnings: run.report.warnings,
            file_name: run.export.file_name,
            mime_type: run.export.mime_type,
            export: run.export.bytes,
            keywords: run.keywords,
        }
    }
}

#[pymethods]
impl PyKeywordCleanRun {
    #[getter]
    fn n_keywords(&self) -> usize {
        self.keywords.len()
    }

    #[getter]
    fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn export_bytes<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new(py, &self.export)
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        self.counts.clone()
    }

    fn __str__(&self) -> String {
        self.message.clone()
    }
}

fn map_serialization_fault(fault: SerializationFault) -> PyErr {
    PyRuntimeError::new_err(fault.to_string())
}

#[pyfunction(name = "clean_keywords")]
fn clean_keywords_py(py: Python<'_>, data: &[u8]) -> PyResult<PyKeywordCleanRun> {
    let options = derive_default_keyword_clean_options();
    let run = py.allow_threads(|| clean_workbook_bytes(data, &options));
    let run = run.map_err(map_serialization_fault)?;
    Ok(PyKeywordCleanRun::from(run))
}

#[pymodule]
fn _kwclean_xlsx_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyKeywordCleanRun>()?;
    module.add_function(wrap_pyfunction!(clean_keywords_py, module)?)?;
    module.add("EXPORT_FILE_NAME", C_EXPORT_FILE_NAME)?;
    module.add("EXPORT_MIME_TYPE", C_EXPORT_MIME_TYPE)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
